//! Shared UI icons.

use console::Emoji;

// Completion lines
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
pub static HAMMER: Emoji<'_, '_> = Emoji("🛠 ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN] ");

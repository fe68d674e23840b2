pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const PERSON: &str = "👤";
    pub const HEART: &str = "💚";
    pub const LINK: &str = "🔗";
    pub const DATABASE: &str = "🗄️";
    pub const KEY: &str = "🔑";
    pub const BROOM: &str = "🧹";
}

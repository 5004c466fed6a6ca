pub mod code;
pub mod divider;
pub mod embed;
pub mod heading;
pub mod image;
pub mod list;
pub mod paragraph;
pub mod quote;
pub mod table;

pub use code::Code;
pub use divider::Divider;
pub use embed::Embed;
pub use heading::Heading;
pub use image::Image;
pub use list::List;
pub use paragraph::Paragraph;
pub use quote::Quote;
pub use table::Table;

use crate::blocks::registry::Registry;

/// Fallback tag used when an unregistered type is requested.
pub const DEFAULT_TAG: &str = "paragraph";

/// Register every built-in block kind.
pub fn register_builtins(registry: &mut Registry) {
    registry.register(Box::new(Paragraph));
    registry.register(Box::new(Heading));
    registry.register(Box::new(List));
    registry.register(Box::new(Quote));
    registry.register(Box::new(Code));
    registry.register(Box::new(Divider));
    registry.register(Box::new(Image));
    registry.register(Box::new(Table));
    registry.register(Box::new(Embed));
}

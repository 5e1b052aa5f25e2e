mod frontmatter;
mod note;
mod store;

pub use note::Note;
pub use store::Store;

mod contextual_create;
mod make_face;

pub use contextual_create::ContextualCreate;
pub use make_face::MakeFace;

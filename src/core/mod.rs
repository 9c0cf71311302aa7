pub mod anim;
pub mod assets;
pub mod gfx;

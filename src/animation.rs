pub(crate) mod anim;
pub(crate) mod clock;
pub(crate) mod ease;

pub mod intent;
pub mod slots;
pub mod stay;

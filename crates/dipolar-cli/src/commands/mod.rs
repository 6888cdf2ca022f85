pub mod compute;
pub mod inspect;

pub mod addresses;
pub mod bottom_bar;
pub mod header;
pub mod home;
pub mod util;

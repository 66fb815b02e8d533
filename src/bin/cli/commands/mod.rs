pub mod card;
pub mod scan;
pub mod seed;
pub mod settings;
pub mod wishlist;

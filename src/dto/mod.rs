pub mod auth;
pub mod cart;
pub mod categories;
pub mod payments;
pub mod products;
pub mod tags;
pub mod wishlists;

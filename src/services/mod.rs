pub mod movers;
pub mod research;

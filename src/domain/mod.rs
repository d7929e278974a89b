// Core model and engines: trees, symbols, canonical traversal, equality and hashing.

pub mod corpus;
pub mod equality;
pub mod expr;
pub mod hashing;
pub mod linearize;
pub mod symbol;
pub mod value;
pub mod visit;

pub mod social;

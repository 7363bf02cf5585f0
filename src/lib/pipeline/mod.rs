pub mod solo;

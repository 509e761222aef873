pub mod plaque;

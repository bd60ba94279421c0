pub mod pan;

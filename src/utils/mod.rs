pub mod privilege;

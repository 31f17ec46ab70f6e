pub mod toolkit;

mod campaign;

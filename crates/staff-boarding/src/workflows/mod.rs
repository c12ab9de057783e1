pub mod boarding;

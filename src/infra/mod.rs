pub mod air4thai;

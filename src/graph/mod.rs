pub mod precedence_dag;

pub use precedence_dag::PrecedenceDag;

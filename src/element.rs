pub mod interp;
pub mod node;
pub mod quadrature;

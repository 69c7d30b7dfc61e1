pub mod automation;
pub mod buffers;
pub mod catalog;
pub mod devices;
pub mod graph;
pub mod offline;

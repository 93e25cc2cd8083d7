pub mod allocation;
pub mod approval;
pub mod project;
pub mod selection;
pub mod service;
pub mod staff;
pub mod tier;

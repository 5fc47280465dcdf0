// Infrastructure adapters implementing the application ports

pub mod file_lead_source;
pub mod file_output_adapter;

pub use file_lead_source::FileLeadSource;
pub use file_output_adapter::FileOutputAdapter;

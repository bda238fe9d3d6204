pub mod approval;
pub mod evidence;
pub mod kpi;
pub mod organization;
pub mod submission;

pub(crate) mod examples;
pub(crate) mod report;

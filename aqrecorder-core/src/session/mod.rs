pub mod metering;
pub mod recorder;

#[cfg(test)]
pub(crate) mod test_support;

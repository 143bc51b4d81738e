mod test_assignment;
mod test_data;
mod test_sampling;


mod test_layout_samples;

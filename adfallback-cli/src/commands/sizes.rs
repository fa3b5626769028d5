//! `sizes` command.

use adfallback::ViewportBucket;

use super::common::format_sizes;
use crate::error::CliError;

/// Print the bucket and slot sizes for a viewport width.
pub fn run(width: u32) -> Result<(), CliError> {
    let bucket = ViewportBucket::for_width(width);
    println!("Viewport: {}px ({})", width, bucket);
    println!("Sizes:    {}", format_sizes(bucket.sizes()));
    Ok(())
}

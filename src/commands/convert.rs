use crate::config::ConvertConfig;
use crate::logger::Logger;
use crate::processing::convert::{batch_convert, ConversionReport};

/// Converts the PNG tree under `input_dir` into WebP files under `output_dir`
pub fn run(config: &ConvertConfig) -> ConversionReport {
    Logger::workflow_start("PNG to WebP conversion", &config.input_dir);
    Logger::stats("Output:", &config.output_dir.display().to_string());
    Logger::stats("Quality:", &config.quality.to_string());

    let report = batch_convert(&config.input_dir, &config.output_dir, config.quality);

    Logger::batch_complete(
        report.converted.len(),
        0,
        0,
        report.failures.len(),
        report.total(),
        "conversion",
    );
    Logger::batch_failures(&report.failures);
    report
}

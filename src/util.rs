use indicatif::{ProgressBar, ProgressStyle};

pub(crate) fn create_progress_bar(total_readings: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_readings);

    let style = ProgressStyle::default_bar()
        .template("[{spinner:.green} {elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(msg.to_owned());

    pb
}

//! Example demonstrating local date/time helpers

use service_utils::datetime::{self, DayBoundary};

fn main() -> anyhow::Result<()> {
    println!("now: {}", datetime::now_to_string(datetime::YYYY_MM_DD_HH_MM_SS_SSS)?);
    println!(
        "year={} month={} day={} day_of_year={}",
        datetime::year(),
        datetime::month_of_year(),
        datetime::day_of_month(),
        datetime::day_of_year()
    );

    let start = datetime::start_of_month();
    let end = datetime::end_of_month();
    println!(
        "this month: {} .. {} ({} ms)",
        datetime::local_time_to_string(&start, datetime::YYYY_MM_DD_HH_MM_SS)?,
        datetime::local_time_to_string(&end, datetime::YYYY_MM_DD_HH_MM_SS)?,
        datetime::millis_between(&start, &end)
    );

    let release = datetime::string_to_local_time("31-01-2024 18:30:00", datetime::DD_MM_YYYY_HH_MM_SS)?;
    let week_before = datetime::days_before(&release, 7, DayBoundary::Start)?;
    let week_after = datetime::days_after(&release, 7, DayBoundary::End)?;
    println!(
        "window: {} .. {}",
        datetime::local_time_to_string(&week_before, datetime::YYYY_MM_DD_HH_MM_SS_SSS)?,
        datetime::local_time_to_string(&week_after, datetime::YYYY_MM_DD_HH_MM_SS_SSS)?
    );

    let millis = datetime::local_time_to_millis(&release);
    println!("release millis: {} -> {}", millis, datetime::millis_to_string(millis, datetime::YYYY_MM_DD)?);
    Ok(())
}

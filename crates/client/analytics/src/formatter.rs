use console::{Style, StyledObject};
use std::{fmt, time::SystemTime};
use time::{format_description, OffsetDateTime, UtcOffset};
use tracing::{field::Visit, Level, Subscriber};
use tracing_core::Field;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

/// Target used by the migration runner for its per-job events.
pub const MIGRATION_TARGET: &str = "walletd.migration";

pub fn display_fn<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result>(f: F) -> impl fmt::Display {
    DisplayFromFn(f)
}
struct DisplayFromFn<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result>(F);
impl<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result> fmt::Display for DisplayFromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

fn strip_quotes(value: &dyn fmt::Debug) -> String {
    format!("{value:?}").trim_matches('"').to_string()
}

#[derive(Default)]
struct MigrationEventVisitor {
    message: String,
    version: Option<String>,
    job: Option<String>,
    elapsed: Option<String>,
    error: Option<String>,
}

impl Visit for MigrationEventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = strip_quotes(value),
            "version" => self.version = Some(strip_quotes(value)),
            "job" => self.job = Some(strip_quotes(value)),
            "elapsed" => self.elapsed = Some(strip_quotes(value)),
            "error" => self.error = Some(strip_quotes(value)),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "version" => self.version = Some(value.to_string()),
            "job" => self.job = Some(value.to_string()),
            "error" => self.error = Some(value.to_string()),
            _ => {}
        }
    }
}

pub fn visit_message(event: &tracing::Event<'_>, f: impl FnOnce(&dyn fmt::Debug) -> fmt::Result) -> fmt::Result {
    struct Visitor<F>(Option<F>, fmt::Result);
    impl<F: FnOnce(&dyn fmt::Debug) -> fmt::Result> Visit for Visitor<F> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                if let Some(f) = self.0.take() {
                    self.1 = (f)(value);
                }
            }
        }
    }
    let mut visitor = Visitor(Some(f), Ok(()));
    event.record(&mut visitor);
    visitor.1
}

pub struct CustomFormatter {
    local_offset: UtcOffset,
    dim_style: Style,
    open_bracket_dim: StyledObject<&'static str>,
    closed_bracket_dim: StyledObject<&'static str>,
    ts_format: Vec<format_description::BorrowedFormatItem<'static>>,
}

impl Default for CustomFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomFormatter {
    pub fn new() -> Self {
        let dim_style = Style::new().dim();
        Self {
            open_bracket_dim: dim_style.apply_to("["),
            closed_bracket_dim: dim_style.apply_to("]"),
            local_offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
            dim_style,
            ts_format: format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]:[subsecond digits:3]")
                .expect("Invalid date format constant"),
        }
    }

    fn timestamp_fmt<'a>(&'a self, ts: &'a SystemTime) -> impl fmt::Display + 'a {
        display_fn(|f| {
            let datetime: OffsetDateTime = (*ts).into();
            let local_datetime = datetime.to_offset(self.local_offset);
            match local_datetime.format(&self.ts_format) {
                Ok(ts) => {
                    write!(f, "{}{}{}", self.open_bracket_dim, self.dim_style.apply_to(ts), self.closed_bracket_dim)
                }
                Err(_) => write!(f, "<error>"),
            }
        })
    }

    fn format_without_target(
        &self,
        writer: &mut Writer<'_>,
        event: &tracing::Event<'_>,
        ts: &SystemTime,
        level: &Level,
        level_style: &Style,
    ) -> fmt::Result {
        visit_message(event, |message| {
            writeln!(writer, "{} {} {:?}", self.timestamp_fmt(ts), level_style.apply_to(level), message)
        })
    }

    fn format_with_target(
        &self,
        writer: &mut Writer<'_>,
        event: &tracing::Event<'_>,
        target: &str,
        ts: &SystemTime,
        level: &Level,
        level_style: &Style,
    ) -> fmt::Result {
        visit_message(event, |message| {
            writeln!(
                writer,
                "{} {} {} {:?}",
                self.timestamp_fmt(ts),
                level_style.apply_to(level),
                self.dim_style.apply_to(target),
                message,
            )
        })
    }

    /// `[ts] MIGRATION [WARN|ERROR] message version=.. job=.. error=.. - elapsed`
    fn format_migration(
        &self,
        writer: &mut Writer<'_>,
        event: &tracing::Event<'_>,
        ts: &SystemTime,
        level: &Level,
    ) -> fmt::Result {
        let mut visitor = MigrationEventVisitor::default();
        event.record(&mut visitor);

        write!(writer, "{} {}", self.timestamp_fmt(ts), Style::new().cyan().apply_to("MIGRATION"))?;

        match *level {
            Level::WARN => write!(writer, " {}", Style::new().yellow().apply_to("WARN"))?,
            Level::ERROR => write!(writer, " {}", Style::new().red().apply_to("ERROR"))?,
            _ => {}
        }

        write!(writer, " {}", visitor.message)?;

        if let Some(version) = &visitor.version {
            write!(writer, " {}", self.dim_style.apply_to(format!("version={version}")))?;
        }
        if let Some(job) = &visitor.job {
            write!(writer, " {}", self.dim_style.apply_to(format!("job={job}")))?;
        }
        if let Some(error) = &visitor.error {
            write!(writer, " {}", Style::new().red().apply_to(format!("error={error}")))?;
        }
        if let Some(elapsed) = &visitor.elapsed {
            write!(writer, " {}", Self::timing_style(elapsed).apply_to(format!("- {elapsed}")))?;
        }

        writeln!(writer)
    }

    /// Duration Debug format: "15.833µs", "1.732s", "234ms", "123ns"
    fn timing_style(timing: &str) -> Style {
        let timing = timing.trim();
        if timing.ends_with("ns") || timing.ends_with("µs") || timing.ends_with("us") {
            return Style::new().dim();
        }
        if let Some(millis) = timing.strip_suffix("ms") {
            return match millis.trim().parse::<f64>() {
                Ok(val) if val > 1000.0 => Style::new().red(),
                Ok(val) if val > 100.0 => Style::new().yellow(),
                _ => Style::new().dim(),
            };
        }
        if let Some(secs) = timing.strip_suffix('s') {
            return match secs.trim().parse::<f64>() {
                Ok(val) if val > 5.0 => Style::new().red(),
                Ok(val) if val > 1.0 => Style::new().yellow(),
                _ => Style::new().dim(),
            };
        }
        Style::new().dim()
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let ts = SystemTime::now();

        let metadata = event.metadata();
        let level = metadata.level();
        let target = metadata.target();

        match (level, target) {
            (_, MIGRATION_TARGET) => self.format_migration(&mut writer, event, &ts, level),
            (&Level::INFO, _) => self.format_without_target(&mut writer, event, &ts, level, &Style::new().green()),
            (&Level::WARN, _) => {
                self.format_with_target(&mut writer, event, target, &ts, level, &Style::new().yellow())
            }
            (&Level::ERROR, _) => self.format_with_target(&mut writer, event, target, &ts, level, &Style::new().red()),
            (&Level::DEBUG, _) => self.format_with_target(&mut writer, event, target, &ts, level, &Style::new().blue()),
            (&Level::TRACE, _) => self.format_with_target(&mut writer, event, target, &ts, level, &Style::new().cyan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("15.833µs", Style::new().dim())]
    #[case("123ns", Style::new().dim())]
    #[case("234ms", Style::new().yellow())]
    #[case("1500ms", Style::new().red())]
    #[case("1.732s", Style::new().yellow())]
    #[case("12.5s", Style::new().red())]
    #[case("0.2s", Style::new().dim())]
    fn timing_style_reflects_duration(#[case] timing: &str, #[case] expected: Style) {
        assert_eq!(format!("{:?}", CustomFormatter::timing_style(timing)), format!("{expected:?}"));
    }

    #[test]
    fn display_fn_writes_through() {
        assert_eq!(display_fn(|f| write!(f, "job={}", 3)).to_string(), "job=3");
    }
}

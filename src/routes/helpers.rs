use std::error::Error;

pub fn error_chain_fmt(e: &impl Error, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}

/// Logs every failed delivery on its own; one failure says nothing about the others.
pub fn log_failed_deliveries<T, E>(outcomes: &[(&str, Result<T, E>)]) -> usize
where
    E: std::fmt::Debug + std::fmt::Display,
{
    let mut failed = 0;
    for (kind, outcome) in outcomes {
        if let Err(e) = outcome {
            failed += 1;
            tracing::warn!(
                email.kind = %kind,
                error.cause_chain = ?e,
                error.message = %e,
                "Best-effort email was not delivered"
            );
        }
    }
    failed
}

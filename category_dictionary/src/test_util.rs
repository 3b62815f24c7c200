//! Testing helpers for the arrow batches produced by the analytics methods.

/// Compares the formatted output with the pretty formatted results of
/// record batches. This is a macro so errors appear on the correct line
///
/// Designed so that failure output can be directly copy/pasted
/// into the test code as expected results.
///
/// Expects to be called about like this:
/// assert_batches_eq(expected_lines: &[&str], batches: &[RecordBatch])
#[macro_export]
macro_rules! assert_batches_eq {
    ($EXPECTED_LINES: expr, $BATCHES: expr) => {
        let expected_lines: Vec<String> =
            $EXPECTED_LINES.into_iter().map(|s| s.to_string()).collect();

        let formatted = arrow::util::pretty::pretty_format_batches($BATCHES)
            .unwrap()
            .to_string();

        let actual_lines = formatted.trim().lines().collect::<Vec<_>>();

        assert_eq!(
            expected_lines, actual_lines,
            "\n\nexpected:\n\n{:#?}\nactual:\n\n{:#?}\n\n",
            expected_lines, actual_lines
        );
    };
}

/// Builds a `Vec<Option<&str>>` from string literals, treating `""` as a
/// missing row.
pub fn values<'a>(values: &[&'a str]) -> Vec<Option<&'a str>> {
    values
        .iter()
        .map(|&value| (!value.is_empty()).then_some(value))
        .collect()
}

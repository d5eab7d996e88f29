//! Property tests for shell quoting and command batching.

use proptest::prelude::*;

use drover::{quote, CommandBatch, ShellCommand, Transport};

/// Printable ASCII with no leading/trailing whitespace, so the captured
/// output (which is trimmed at the transport boundary) compares exactly.
fn printable_word() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~]{1,40}")
        .unwrap()
        .prop_filter("no surrounding whitespace", |s| s.trim() == s)
        // A leading dash could be taken for a printf option by some shells.
        .prop_filter("no leading dash", |s| !s.starts_with('-'))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a quoted word passes through the shell unchanged.
    #[test]
    fn property_quote_round_trips_through_sh(word in printable_word()) {
        let transport = drover::LocalShell;
        let command = format!("printf '%s' {}", quote(&word));
        let output = transport.run_capture(&command).unwrap();
        prop_assert_eq!(output, word);
    }

    /// PROPERTY: quoting never panics and never yields an empty word.
    #[test]
    fn property_quote_never_empty(s in "(?s).{0,128}") {
        let quoted = quote(&s);
        prop_assert!(!quoted.is_empty());
    }

    /// PROPERTY: rendering an argv command never loses arguments.
    #[test]
    fn property_argv_render_contains_every_arg(
        args in proptest::collection::vec(printable_word(), 1..6)
    ) {
        let mut command = ShellCommand::program("prog");
        for arg in &args {
            command = command.arg(arg.clone());
        }
        let rendered = command.render();
        // One shell word per argument plus the program name.
        prop_assert!(rendered.starts_with("prog"));
        for arg in &args {
            let quoted = quote(arg);
            prop_assert!(
                rendered.contains(&quoted),
                "rendered '{}' missing '{}'", rendered, quoted
            );
        }
    }

    /// PROPERTY: a batch of n commands renders with exactly n-1 joins.
    #[test]
    fn property_batch_join_count(n in 1usize..8) {
        let batch: CommandBatch = (0..n)
            .map(|i| ShellCommand::program("true").arg(i.to_string()))
            .collect();
        let rendered = batch.render().unwrap();
        prop_assert_eq!(rendered.matches(" && ").count(), n - 1);
    }
}

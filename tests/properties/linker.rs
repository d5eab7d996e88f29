//! Property tests for the shared resource linker.

use std::path::PathBuf;

use proptest::prelude::*;

use drover::{link_commands, SharedResource};

fn path_segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9._-]{1,12}").unwrap()
}

fn shared_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(path_segment(), 1..=4).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: per shared path there is exactly one remove, zero-or-one
    /// mkdir and exactly one link, in that order; mkdir appears iff the
    /// path is nested.
    #[test]
    fn property_operation_shape_per_path(paths in proptest::collection::vec(shared_path(), 1..6)) {
        let resources: Vec<SharedResource> =
            paths.iter().map(SharedResource::file).collect();
        let commands = link_commands(
            &resources,
            &PathBuf::from("/rel/1"),
            &PathBuf::from("/shared"),
        );
        let rendered: Vec<String> = commands.iter().map(|c| c.render()).collect();

        let mut cursor = 0;
        for path in &paths {
            prop_assert!(rendered[cursor].starts_with("rm -rf "), "got {}", rendered[cursor]);
            cursor += 1;
            if path.contains('/') {
                prop_assert!(rendered[cursor].starts_with("mkdir -p "), "got {}", rendered[cursor]);
                cursor += 1;
            }
            prop_assert!(rendered[cursor].starts_with("ln -s "), "got {}", rendered[cursor]);
            cursor += 1;
        }
        prop_assert_eq!(cursor, rendered.len());
    }

    /// PROPERTY: the link source is always named by the final path segment.
    #[test]
    fn property_link_source_is_basename(path in shared_path()) {
        let resources = [SharedResource::dir(path.clone())];
        let commands = link_commands(
            &resources,
            &PathBuf::from("/rel/1"),
            &PathBuf::from("/shared"),
        );
        let link = commands.last().unwrap().render();
        let basename = path.rsplit('/').next().unwrap();
        prop_assert!(
            link.starts_with(&format!("ln -s /shared/{} ", basename)),
            "got {}",
            link
        );
    }
}

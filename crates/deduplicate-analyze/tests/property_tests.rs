use deduplicate_analyze::DuplicateFinder;
use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every group holds byte-identical files and every non-empty content
    /// seen more than once ends up in exactly one group.
    #[test]
    fn groups_match_content_equality(
        contents in prop::collection::vec(
            prop::sample::select(vec![
                Vec::new(),
                b"a".to_vec(),
                b"b".to_vec(),
                b"ab".to_vec(),
                vec![7u8; 1500],
                {
                    let mut v = vec![7u8; 1500];
                    v[1400] = 8;
                    v
                },
            ]),
            0..12,
        )
    ) {
        let temp = TempDir::new().unwrap();
        let paths: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let path = temp.path().join(format!("f{i}"));
                fs::write(&path, content).unwrap();
                path
            })
            .collect();

        let report = DuplicateFinder::new().find_duplicates(paths.clone()).unwrap();

        let mut expected: HashMap<&Vec<u8>, Vec<_>> = HashMap::new();
        for (content, path) in contents.iter().zip(&paths) {
            if !content.is_empty() {
                expected.entry(content).or_default().push(path.clone());
            }
        }
        expected.retain(|_, members| members.len() > 1);

        prop_assert_eq!(report.group_count(), expected.len());
        for group in report.iter() {
            let first = fs::read(&group.paths[0]).unwrap();
            prop_assert_eq!(expected.get(&first), Some(&group.paths));
        }
    }
}

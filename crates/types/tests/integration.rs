//! Integration tests for types

#[cfg(test)]
mod tests {
    use std::path::Path;
    use unityup_types::*;

    #[test]
    fn test_parse_version() {
        let version: VersionMetadata = "2021.3.5f1".parse().unwrap();
        assert_eq!(version.major, 2021);
        assert_eq!(version.minor, 3);
        assert_eq!(version.patch, 5);
        assert_eq!(version.release_type, ReleaseType::Final);
        assert_eq!(version.build, 1);
        assert!(version.hash.is_none());
    }

    #[test]
    fn test_parse_version_with_hash() {
        let version: VersionMetadata = "2022.1.0b12 (abcd1234)".parse().unwrap();
        assert_eq!(version.release_type, ReleaseType::Beta);
        assert_eq!(version.build, 12);
        assert_eq!(version.hash.as_deref(), Some("abcd1234"));
        assert_eq!(version.to_string(), "2022.1.0b12 (abcd1234)");
        assert_eq!(version.short(), "2022.1.0b12");
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        assert!("2021.3".parse::<VersionMetadata>().is_err());
        assert!("2021.3.5".parse::<VersionMetadata>().is_err());
        assert!("2021.3.5q1".parse::<VersionMetadata>().is_err());
        assert!("2021.3.5f".parse::<VersionMetadata>().is_err());
        assert!("2021.3.5f1 (abcd".parse::<VersionMetadata>().is_err());
    }

    #[test]
    fn test_version_matching_ignores_missing_hash() {
        let with_hash = VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1).with_hash("abcd");
        let without_hash = VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1);
        let other_hash = VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1).with_hash("ffff");
        assert!(with_hash.matches(&without_hash));
        assert!(!with_hash.matches(&other_hash));
        assert!(!with_hash.matches(&VersionMetadata::new(2021, 3, 6, ReleaseType::Final, 1)));
    }

    #[test]
    fn test_file_type_from_extension() {
        let cases = [
            ("Unity.pkg", PackageFileType::Pkg),
            ("Unity-Setup.EXE", PackageFileType::Exe),
            ("docs.zip", PackageFileType::Zip),
            ("ja.po", PackageFileType::Po),
            ("Editor.tar.xz", PackageFileType::TarXz),
            ("Editor.tgz", PackageFileType::TarGz),
            ("android.msi", PackageFileType::Msi),
            ("Mono.dmg", PackageFileType::Dmg),
        ];
        for (name, expected) in cases {
            assert_eq!(PackageFileType::from_path(Path::new(name)), expected, "{name}");
        }
        assert_eq!(
            PackageFileType::from_path(Path::new("thing.rar")),
            PackageFileType::Unknown("rar".to_string())
        );
    }

    #[test]
    fn test_queue_editor_detection_and_order() {
        let version = VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1);
        let fresh = InstallQueue::new(version.clone())
            .with_item(PackageItem::new(EDITOR_PACKAGE, "/tmp/Unity.pkg"))
            .with_item(PackageItem::new("Android", "/tmp/Android.pkg"));
        assert!(fresh.includes_editor());
        assert!(fresh.validate().is_ok());

        let upgrade = InstallQueue::new(version.clone())
            .with_item(PackageItem::new("Android", "/tmp/Android.pkg"));
        assert!(!upgrade.includes_editor());
        assert!(upgrade.validate().is_ok());

        let misordered = InstallQueue::new(version)
            .with_item(PackageItem::new("Android", "/tmp/Android.pkg"))
            .with_item(PackageItem::new(EDITOR_PACKAGE, "/tmp/Unity.pkg"));
        assert!(misordered.validate().is_err());
    }

    #[test]
    fn test_release_type_serialization() {
        let json = serde_json::to_string(&ReleaseType::Final).unwrap();
        assert_eq!(json, r#""final""#);
    }

    #[test]
    fn test_elevation_method_parse() {
        assert_eq!(ElevationMethod::parse("SUDO"), Some(ElevationMethod::Sudo));
        assert_eq!(ElevationMethod::parse(" none "), Some(ElevationMethod::None));
        assert_eq!(ElevationMethod::parse("doas"), None);
        assert_eq!(ElevationMethod::default(), ElevationMethod::Auto);
    }
}

//! Integration tests: sysfs topology resolution against a fake bus tree.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use platform::Topology;
use tempfile::TempDir;

/// Fake `/sys/bus/axent_fpga_bus` with `devices/` and `drivers/axent_ledfb/`.
struct FakeBus {
    tmp: TempDir,
}

impl FakeBus {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("devices")).unwrap();
        fs::create_dir_all(tmp.path().join("drivers/axent_ledfb")).unwrap();
        // Driver directories always carry control files next to the panels.
        fs::write(tmp.path().join("drivers/axent_ledfb/bind"), b"").unwrap();
        fs::write(tmp.path().join("drivers/axent_ledfb/uevent"), b"").unwrap();
        Self { tmp }
    }

    fn devices(&self) -> PathBuf {
        self.tmp.path().join("devices")
    }

    fn driver(&self) -> PathBuf {
        self.tmp.path().join("drivers/axent_ledfb")
    }

    fn add_slot(&self, name: &str, fb: Option<&str>, bound: bool) {
        let dir = self.devices().join(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(fb) = fb {
            fs::create_dir_all(dir.join("graphics").join(fb)).unwrap();
        }
        if bound {
            std::os::unix::fs::symlink(&dir, self.driver().join(name)).unwrap();
        }
    }

    fn topology(&self) -> Topology {
        Topology::new(self.devices(), self.driver(), "/dev")
    }
}

#[test]
fn resolve_all_skips_slot_without_graphics_child() {
    let bus = FakeBus::new();
    bus.add_slot("front", Some("fb0"), true);
    bus.add_slot("relay", None, false);
    bus.add_slot("rear", Some("fb1"), true);

    let topo = bus.topology();
    let resolved: Vec<PathBuf> = topo.resolve_all(["front", "relay", "rear", "ghost"]).collect();

    assert_eq!(resolved, vec![PathBuf::from("/dev/fb0"), PathBuf::from("/dev/fb1")]);
}

#[test]
fn resolve_all_is_lazy_and_reusable() {
    let bus = FakeBus::new();
    bus.add_slot("front", Some("fb0"), true);
    let topo = bus.topology();

    let slots = vec!["front".to_string(), "ghost".to_string()];
    let mut iter = topo.resolve_all(&slots);
    assert_eq!(iter.next(), Some(PathBuf::from("/dev/fb0")));
    assert_eq!(iter.next(), None);
}

#[test]
fn display_map_labels_bound_panels_only() {
    let bus = FakeBus::new();
    bus.add_slot("front", Some("fb0"), true);
    bus.add_slot("rear", Some("fb2"), true);
    bus.add_slot("spare", Some("fb5"), false);

    let map = bus.topology().display_map();

    assert_eq!(map.len(), 2, "bind/uevent and unbound slots are left out: {map:?}");
    assert_eq!(map.get(Path::new("/dev/fb0")).map(String::as_str), Some("front"));
    assert_eq!(map.get(Path::new("/dev/fb2")).map(String::as_str), Some("rear"));
}

#[test]
fn display_names_are_sorted() {
    let bus = FakeBus::new();
    bus.add_slot("zeta", Some("fb0"), true);
    bus.add_slot("alpha", Some("fb1"), true);

    assert_eq!(bus.topology().display_names(), vec!["alpha", "zeta"]);
}

#[test]
fn display_name_for_unknown_device_is_none() {
    let bus = FakeBus::new();
    bus.add_slot("front", Some("fb0"), true);

    let topo = bus.topology();
    assert_eq!(topo.display_name_for(Path::new("/dev/fb0")).as_deref(), Some("front"));
    assert_eq!(topo.display_name_for(Path::new("/dev/fb7")), None);
}

#[test]
fn missing_driver_directory_gives_empty_map() {
    let tmp = TempDir::new().unwrap();
    let topo = Topology::new(tmp.path(), tmp.path().join("absent"), "/dev");
    assert!(topo.display_map().is_empty());
}

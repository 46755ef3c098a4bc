use phoenix::{
    Catalog, ContainerError, ContainerRef, Injectable, create_container, default_container,
    init_default, set_default,
};

#[derive(Injectable)]
#[export(Self)]
struct Settings;

#[derive(Injectable)]
struct Unexported;

// The default container lives for the whole test binary, so every step runs
// in one test.
#[test]
fn test_default_container() {
    let catalog = Catalog::new("defaults")
        .with::<Settings>()
        .with::<Unexported>();
    let container = init_default(&catalog).unwrap();
    assert!(container.is_registered::<Settings>());
    assert!(!container.is_registered::<Unexported>());
    assert!(container.ptr_eq(default_container()));

    let this = default_container().resolve::<ContainerRef>().unwrap();
    assert!(this.upgrade().unwrap().ptr_eq(container));

    assert!(matches!(
        init_default(&Catalog::new("again")),
        Err(ContainerError::AlreadyInitialized)
    ));
    let rejected = set_default(create_container()).err().unwrap();
    assert!(!rejected.ptr_eq(default_container()));

    let independent = create_container();
    assert!(!independent.is_registered::<Settings>());
    assert!(!independent.ptr_eq(default_container()));
}

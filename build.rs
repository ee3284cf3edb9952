use std::ptr;

struct Sample(usize);

trait Callable {
    fn call(&self) -> usize;
}

impl Callable for Sample {
    fn call(&self) -> usize {
        self.0
    }
}

fn layout_broken(what: &str) {
    panic!(
        concat!(
            "Assumptions on layout are broken, this crate relies on ",
            "`unsafe code guidelines` layout specification, ",
            "now layout of {:?} is broken, report about it on github"
        ),
        what
    );
}

/// Inline storage rebuilds `*mut dyn Trait` pointers by overwriting the
/// data half of an existing trait-object pointer, so the data pointer must
/// be the first word and the vtable must survive the rewrite.
fn test_dyn_layout() {
    #[allow(dead_code)]
    #[repr(C)]
    struct DynObj {
        data_ptr: *const u8,
        vtable: *const u8,
    }

    let first = Box::into_raw(Box::new(Sample(100)));
    let second = Box::into_raw(Box::new(Sample(200)));

    let mut trait_obj: *const dyn Callable = first;
    let repr: DynObj = unsafe { ptr::read(ptr::addr_of!(trait_obj).cast::<DynObj>()) };
    if repr.data_ptr != first.cast_const().cast::<u8>() {
        layout_broken("trait objects");
    }

    unsafe {
        ptr::addr_of_mut!(trait_obj)
            .cast::<usize>()
            .write(second as usize);
        if (*trait_obj).call() != 200 {
            layout_broken("trait objects");
        }
        drop(Box::from_raw(first));
        drop(Box::from_raw(second));
    }
}

fn main() {
    // NOTE: this will not protect from every possible case, host layout may
    // be different from target layout.
    test_dyn_layout();
}

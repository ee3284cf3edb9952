//! Rebuilds trait-object pointers from a raw buffer address and the vtable
//! carried by another pointer of the same trait-object type.
//!
//! Inline storage keeps a `*const dyn Concept<..>` whose address part is
//! meaningless; only its metadata is used. These helpers attach that
//! metadata to the address of the inline buffer.

#[cfg(feature = "nightly")]
mod implementation {
    pub fn with_metadata_of<U: ?Sized>(addr: *const u8, meta: *const U) -> *const U {
        addr.with_metadata_of(meta)
    }

    pub fn with_metadata_of_mut<U: ?Sized>(addr: *mut u8, meta: *const U) -> *mut U {
        addr.with_metadata_of(meta)
    }
}

#[cfg(not(feature = "nightly"))]
#[allow(clippy::as_conversions)]
mod implementation {
    use core::ptr::addr_of_mut;

    pub fn with_metadata_of<U: ?Sized>(addr: *const u8, meta: *const U) -> *const U {
        with_metadata_of_mut(addr.cast_mut(), meta)
    }

    // `build.rs` checks that the data pointer is the first word of a
    // trait-object pointer.
    pub fn with_metadata_of_mut<U: ?Sized>(addr: *mut u8, mut meta: *const U) -> *mut U {
        let meta_ptr = addr_of_mut!(meta).cast::<usize>();
        unsafe { meta_ptr.write(addr as usize) }
        meta.cast_mut()
    }
}

pub use implementation::*;

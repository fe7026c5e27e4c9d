//! Host and worker memory utilities.
//!
//! Host-side Feature/Descriptor storage has no degraded path: a process that
//! cannot hold its own data terminates, after logging the requested size and
//! the underlying cause. Registration (pin/unpin) and huge-page advice are
//! best effort; their failures are logged warnings, never errors.

use std::io;

use tracing::{error, warn};

/// Allocate a zero-initialized host vector of `len` elements.
///
/// Allocation failure is fatal: the requested byte size and the cause
/// (capacity overflow vs. allocator refusal) are logged and the process
/// aborts.
pub fn alloc_host_vec<T: Default + Clone>(len: usize) -> Vec<T> {
    let mut vec: Vec<T> = Vec::new();
    reserve_host(&mut vec, len);
    vec.resize(len, T::default());
    vec
}

/// Grow a host vector by `additional` elements, aborting on failure.
pub fn reserve_host<T>(vec: &mut Vec<T>, additional: usize) {
    if let Err(err) = vec.try_reserve(additional) {
        let requested = additional.saturating_mul(std::mem::size_of::<T>());
        error!(
            requested_bytes = requested,
            cause = %err,
            "host feature/descriptor allocation failed"
        );
        std::process::abort();
    }
}

/// Allocate a worker-side buffer, advising the kernel to back it with huge
/// pages where available. Advice failure is a warning only.
pub fn alloc_worker_vec<T: Default + Clone>(len: usize) -> Vec<T> {
    let mut vec = alloc_host_vec(len);
    if len > 0 {
        let ptr = vec.as_mut_ptr() as *mut u8;
        let bytes = len * std::mem::size_of::<T>();
        // SAFETY: ptr/bytes describe the allocation we just made.
        if let Err(err) = unsafe { advise_huge_pages(ptr, bytes) } {
            warn!(bytes, cause = %err, "huge page advice failed");
        }
    }
    vec
}

/// Register a host memory region for fast transfer (mlock).
///
/// # Safety
/// `ptr` must point to a live allocation of at least `len` bytes.
#[cfg(all(feature = "pinning", target_os = "linux"))]
pub unsafe fn pin_region(ptr: *const u8, len: usize) -> io::Result<()> {
    if len == 0 {
        return Ok(());
    }
    if libc::mlock(ptr as *const libc::c_void, len) == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Registration is a no-op on non-Linux or when the feature is disabled.
///
/// # Safety
/// `ptr` must point to a live allocation of at least `len` bytes.
#[cfg(not(all(feature = "pinning", target_os = "linux")))]
pub unsafe fn pin_region(_ptr: *const u8, _len: usize) -> io::Result<()> {
    Ok(())
}

/// Unregister a previously pinned host memory region (munlock).
///
/// # Safety
/// `ptr`/`len` must describe the same region passed to [`pin_region`].
#[cfg(all(feature = "pinning", target_os = "linux"))]
pub unsafe fn unpin_region(ptr: *const u8, len: usize) -> io::Result<()> {
    if len == 0 {
        return Ok(());
    }
    if libc::munlock(ptr as *const libc::c_void, len) == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// # Safety
/// `ptr`/`len` must describe the same region passed to [`pin_region`].
#[cfg(not(all(feature = "pinning", target_os = "linux")))]
pub unsafe fn unpin_region(_ptr: *const u8, _len: usize) -> io::Result<()> {
    Ok(())
}

/// Advise the kernel to use huge pages for a worker-side region.
///
/// # Safety
/// `ptr` must point to a live allocation of at least `len` bytes.
#[cfg(all(feature = "pinning", target_os = "linux"))]
pub unsafe fn advise_huge_pages(ptr: *mut u8, len: usize) -> io::Result<()> {
    use libc::{madvise, MADV_HUGEPAGE};

    if madvise(ptr as *mut libc::c_void, len, MADV_HUGEPAGE) == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// # Safety
/// `ptr` must point to a live allocation of at least `len` bytes.
#[cfg(not(all(feature = "pinning", target_os = "linux")))]
pub unsafe fn advise_huge_pages(_ptr: *mut u8, _len: usize) -> io::Result<()> {
    Ok(())
}

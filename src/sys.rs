use libc::{c_int, c_long, syscall, timespec};
use std::{io, ptr};
use std::sync::atomic::AtomicU32;

const FUTEX_WAIT: c_int = libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG;
const FUTEX_WAKE: c_int = libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG;

#[inline(always)]
unsafe fn do_futex(uaddr: *const u32, futex_op: c_int, val: u32) -> c_long {
    syscall(libc::SYS_futex, uaddr, futex_op, val, ptr::null::<timespec>(), ptr::null_mut::<u32>(), 0u32)
}

/// Sleeps while `futex` still holds `val`.
///
/// Returns `Ok` on a wakeup (possibly spurious), on a value mismatch and on a
/// signal interruption: all of them just mean "go re-check your state".
#[inline(never)]
pub fn futex_wait(futex: &AtomicU32, val: u32) -> io::Result<()> {
    let ret = unsafe { do_futex(futex.as_ptr(), FUTEX_WAIT, val) };
    if ret == 0 {
        return Ok(());
    }
    let e = io::Error::last_os_error();
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(()),
        _ => Err(e),
    }
}

/// Wakes up to `count` threads sleeping on `futex`, returns how many woke.
#[inline(never)]
pub fn futex_wake(futex: &AtomicU32, count: u32) -> io::Result<u32> {
    let ret = unsafe { do_futex(futex.as_ptr(), FUTEX_WAKE, count) };
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as u32)
    }
}

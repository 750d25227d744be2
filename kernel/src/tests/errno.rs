// 测试：错误代码

use crate::errno::{self, Errno};

#[test]
fn test_errno_values_match_linux() {
    assert_eq!(Errno::TryAgain.as_i32(), 11, "EAGAIN should be 11");
    assert_eq!(Errno::OutOfMemory.as_i32(), 12, "ENOMEM should be 12");
    assert_eq!(Errno::DeviceOrResourceBusy.as_i32(), 16, "EBUSY should be 16");
    assert_eq!(errno::EAGAIN, 11);
    assert_eq!(errno::ENOMEM, 12);
    assert_eq!(errno::EBUSY, 16);
    assert_eq!(Errno::OutOfMemory.as_neg_i32(), -12);
}

#[test]
fn test_errno_display() {
    assert_eq!(format!("{}", Errno::OutOfMemory), "ENOMEM (12)");
    assert_eq!(format!("{}", Errno::DeviceOrResourceBusy), "EBUSY (16)");
}

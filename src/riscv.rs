macro_rules! read_register {
    ($name: ident) => {
        concat_idents::concat_idents!(read = r_, $name {
            #[inline(always)]
            #[must_use]
            pub fn read() -> usize {
                let val: usize;
                unsafe { core::arch::asm!(concat!("csrr {val}, ", stringify!($name)), val = out(reg) val) };
                val
            }
        });
    };
}

read_register!(time);

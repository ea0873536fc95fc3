pub mod boa_runtime;

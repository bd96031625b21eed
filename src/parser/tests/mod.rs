mod dml;
